pub mod items;
pub mod provider;
pub mod proxy;
pub mod settings;
pub mod sync;
