// Pasos concretos, uno por tipo de página.
pub mod cake;
pub mod celebration;
pub mod character;
pub mod countdown;
pub mod flip_cards;
pub mod game;
pub mod letter;
pub mod loading;
pub mod message;
pub mod photo;
pub mod slider;
pub mod timeline;

pub use cake::{CakeStage, CakeStep};
pub use celebration::CelebrationStep;
pub use character::CharacterStep;
pub use countdown::CountdownStep;
pub use flip_cards::FlipCardsStep;
pub use game::{GameMode, GameStep};
pub use letter::LetterStep;
pub use loading::LoadingStep;
pub use message::MessageStep;
pub use photo::PhotoStep;
pub use slider::SliderStep;
pub use timeline::TimelineStep;
