pub mod token_cipher;
