
mod validators;


// Engine tests
mod customization;
mod engine;
