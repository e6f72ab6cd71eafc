pub mod broadcast_emitter;

pub use broadcast_emitter::BroadcastSyncEmitter;
