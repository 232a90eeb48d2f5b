use std::fmt::{Debug, Display, Formatter};

use crate::quantity::Quantity;

pub type WattHours = Quantity<f64, 1, 1>;

impl Display for WattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0} Wh", self.0)
    }
}

impl Debug for WattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}Wh", self.0)
    }
}
