/// Memory window arithmetic at the edges of the 32-bit bus.
pub mod address_window;
