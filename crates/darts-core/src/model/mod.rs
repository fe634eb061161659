pub mod checkout;
pub mod dart;
pub mod player;
pub mod score;
pub mod turn;
