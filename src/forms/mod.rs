pub mod chip_input;
