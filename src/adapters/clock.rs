//! Wall clock in the group's fixed UTC offset.

use crate::ports::Clock;
use chrono::{FixedOffset, NaiveDateTime, Utc};

pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.offset).naive_local()
    }
}
