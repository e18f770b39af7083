//! UseCase layer: application operations over the domain traits.

mod end_round;
mod error;
mod get_round;
mod start_round;

pub use end_round::EndRoundUseCase;
pub use error::{GetRoundError, StartRoundError};
pub use get_round::GetRoundUseCase;
pub use start_round::StartRoundUseCase;
