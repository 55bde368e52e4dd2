pub mod broadcast;
pub mod rest;
pub mod websocket;
