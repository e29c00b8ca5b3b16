//! Type-specific windows built on [`Bank`](crate::bank::Bank)
//!
//! | Window            | Selection source   | Scroll bounds    | Page moves          |
//! |-------------------|--------------------|------------------|---------------------|
//! | tracks            | page               | window           | native              |
//! | effect tracks     | page, offset       | window           | native              |
//! | slots, scenes     | page               | window           | native              |
//! | devices           | device cursor      | window           | emulated (cursor)   |
//! | layers            | page               | layer cursor     | native              |
//! | parameter pages   | selected page      | page list        | emulated (remote)   |
//! | parameters        | none               | remote controls  | remote page moves   |

pub mod device;
pub mod layer;
pub mod parameter;
pub mod scene;
pub mod slot;
pub mod track;

pub use device::{CursorState, DeviceBank};
pub use layer::LayerBank;
pub use parameter::{ParameterBank, ParameterPageBank};
pub use scene::{SceneBank, SceneBankCache};
pub use slot::SlotBank;
pub use track::{TrackBank, TrackBankLayout};
