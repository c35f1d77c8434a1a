//! Model capabilities for Gaussian filtering
//!
//! Dynamics models describe how the hidden state evolves between time
//! steps; observation models describe how measurements arise from it. Each
//! comes in a linear and a nonlinear variant, closed under the
//! [`DynamicsModel`] and [`ObservationModel`] sum types.

mod dynamics;
mod observation;

pub use dynamics::*;
pub use observation::*;
