// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use jiff::Zoned;
use jiff::civil::Date;

/// Supplies the current calendar date for rotation checks.
#[derive(Debug, Clone)]
pub enum Clock {
    /// Today according to the system clock, in the local time zone.
    DefaultClock,
    #[cfg(test)]
    ManualClock(ManualClock),
}

impl Clock {
    pub(crate) fn today(&self) -> Date {
        match self {
            Clock::DefaultClock => Zoned::now().date(),
            #[cfg(test)]
            Clock::ManualClock(clock) => clock.today(),
        }
    }
}

/// A clock whose date is set by hand, so tests can cross day boundaries
/// without wall-clock waits. Clones share the same date.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct ManualClock {
    today: std::sync::Arc<std::sync::Mutex<Date>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(today: Date) -> ManualClock {
        ManualClock {
            today: std::sync::Arc::new(std::sync::Mutex::new(today)),
        }
    }

    fn today(&self) -> Date {
        *self.today.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_today(&self, today: Date) {
        *self.today.lock().unwrap_or_else(|e| e.into_inner()) = today;
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    #[test]
    fn test_manual_clock_adjusting() {
        let clock = ManualClock::new(date(2023, 1, 1));
        assert_eq!(clock.today(), date(2023, 1, 1));

        let shared = clock.clone();
        shared.set_today(date(2024, 1, 1));
        assert_eq!(clock.today(), date(2024, 1, 1));
    }
}
