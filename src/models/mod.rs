mod reservation;
mod settings;
mod space;
mod user;

pub use reservation::*;
pub use settings::*;
pub use space::*;
pub use user::*;
