pub mod accept_encoding;
