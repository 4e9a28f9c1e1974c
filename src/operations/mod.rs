pub mod extent;
pub mod propagation;
pub mod slide;
pub mod snap;

pub use propagation::{
    Displacement, DisplacementMap, MoveKind, Propagate, PropagateFromDrawnSegment,
};
pub use slide::{PushMode, Schedule, SlideInstruction, SlidePlan, SlideSchedule, SlideSeed};
pub use snap::{ResolveSnap, SnapContext, SnapResult, SnapTarget};
