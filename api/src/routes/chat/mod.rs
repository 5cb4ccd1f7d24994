pub mod chat_request;
pub mod chat_route;
pub mod examples_route;
