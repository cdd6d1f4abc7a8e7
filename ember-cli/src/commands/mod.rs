pub mod make_controller;
pub mod make_middleware;
pub mod make_provider;
pub mod serve;
pub mod watch;
