pub mod certificate;
pub mod settings;
