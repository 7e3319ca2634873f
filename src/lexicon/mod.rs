// Lexicons: language packs, the whitelist, and the store that holds them.

pub mod pack;
pub mod store;
pub mod whitelist;
