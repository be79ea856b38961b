//! two-player rock paper scissors over websockets
//!
//! libcommon: wire vocabulary shared by server and client
//! libserver: matchmaking, game sessions and the accept loop
//! libclient: helpers for the terminal client

pub mod libclient;
pub mod libcommon;
pub mod libserver;
