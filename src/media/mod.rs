pub mod guesser;
pub mod streams;
