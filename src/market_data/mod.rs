// Market data module entrypoint
pub mod adapters;   // snapshot sources (HTTP endpoint)
pub mod book_state; // current snapshot + feed health
pub mod poller;     // fixed-interval fetch loop
pub mod types;      // wire types for the snapshot endpoint
