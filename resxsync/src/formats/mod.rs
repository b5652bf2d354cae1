pub mod resx;

// Reexporting the formats for easier access
pub use resx::Format as ResxFormat;
