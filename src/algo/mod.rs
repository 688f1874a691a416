mod first_fit;

pub use first_fit::FirstFit;
