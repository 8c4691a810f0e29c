pub mod cart;
pub mod chat;
pub mod checkout;
pub mod health;
pub mod orders;
pub mod products;
