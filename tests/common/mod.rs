#![allow(dead_code)]

pub mod ensemble;
