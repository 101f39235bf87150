pub use self::{
    page::TrophyPage,
    trophy::{TrophyRecord, TrophyResults},
};

mod page;
mod trophy;
