// HTTP request handlers module
// This module contains all the web request handlers for the application

pub mod auth;
pub mod health;
pub mod photos;
