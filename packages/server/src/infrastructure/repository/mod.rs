mod inmemory;

pub use inmemory::InMemoryRoundRepository;
