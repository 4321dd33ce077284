//! Fixed layout of the quadruped: four legs, two servos each.
//!
//! The iteration order of [`Topology::servos`] is the wire order of the
//! serial command line. The firmware on the microcontroller indexes the
//! comma-separated values by this order, so it must stay in lockstep with it.

use std::fmt;

use crate::model::AngleRange;

/// Number of servos on the robot, and of values in one command line.
pub const SERVO_COUNT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LegId {
    FrontLeft,
    FrontRight,
    BackLeft,
    BackRight,
}

impl LegId {
    pub const ALL: [LegId; 4] = [
        LegId::FrontLeft,
        LegId::FrontRight,
        LegId::BackLeft,
        LegId::BackRight,
    ];

    /// 1-based leg number used by the firmware.
    pub fn number(self) -> u8 {
        match self {
            LegId::FrontLeft => 1,
            LegId::FrontRight => 2,
            LegId::BackLeft => 3,
            LegId::BackRight => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LegId::FrontLeft => "Front Left",
            LegId::FrontRight => "Front Right",
            LegId::BackLeft => "Back Left",
            LegId::BackRight => "Back Right",
        }
    }

    fn index(self) -> usize {
        usize::from(self.number() - 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Joint {
    Hip,
    Ankle,
}

impl Joint {
    fn offset(self) -> usize {
        match self {
            Joint::Hip => 0,
            Joint::Ankle => 1,
        }
    }
}

/// One of the eight servos, addressed by leg and joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServoId {
    pub leg: LegId,
    pub joint: Joint,
}

impl ServoId {
    pub const FLH: ServoId = ServoId::new(LegId::FrontLeft, Joint::Hip);
    pub const FLA: ServoId = ServoId::new(LegId::FrontLeft, Joint::Ankle);
    pub const FRH: ServoId = ServoId::new(LegId::FrontRight, Joint::Hip);
    pub const FRA: ServoId = ServoId::new(LegId::FrontRight, Joint::Ankle);
    pub const BLH: ServoId = ServoId::new(LegId::BackLeft, Joint::Hip);
    pub const BLA: ServoId = ServoId::new(LegId::BackLeft, Joint::Ankle);
    pub const BRH: ServoId = ServoId::new(LegId::BackRight, Joint::Hip);
    pub const BRA: ServoId = ServoId::new(LegId::BackRight, Joint::Ankle);

    /// All servos in wire order.
    pub const ALL: [ServoId; SERVO_COUNT] = [
        ServoId::FLH,
        ServoId::FLA,
        ServoId::FRH,
        ServoId::FRA,
        ServoId::BLH,
        ServoId::BLA,
        ServoId::BRH,
        ServoId::BRA,
    ];

    pub const fn new(leg: LegId, joint: Joint) -> Self {
        Self { leg, joint }
    }

    /// Short code used as the key in the pose file, e.g. `"FLH"`.
    pub fn code(self) -> &'static str {
        match (self.leg, self.joint) {
            (LegId::FrontLeft, Joint::Hip) => "FLH",
            (LegId::FrontLeft, Joint::Ankle) => "FLA",
            (LegId::FrontRight, Joint::Hip) => "FRH",
            (LegId::FrontRight, Joint::Ankle) => "FRA",
            (LegId::BackLeft, Joint::Hip) => "BLH",
            (LegId::BackLeft, Joint::Ankle) => "BLA",
            (LegId::BackRight, Joint::Hip) => "BRH",
            (LegId::BackRight, Joint::Ankle) => "BRA",
        }
    }

    /// Display label, e.g. `"FLH (Front Left Hip)"`.
    ///
    /// Older pose files used this label as the key, so [`ServoId::from_key`]
    /// accepts it as well.
    pub fn label(self) -> &'static str {
        match (self.leg, self.joint) {
            (LegId::FrontLeft, Joint::Hip) => "FLH (Front Left Hip)",
            (LegId::FrontLeft, Joint::Ankle) => "FLA (Front Left Ankle)",
            (LegId::FrontRight, Joint::Hip) => "FRH (Front Right Hip)",
            (LegId::FrontRight, Joint::Ankle) => "FRA (Front Right Ankle)",
            (LegId::BackLeft, Joint::Hip) => "BLH (Back Left Hip)",
            (LegId::BackLeft, Joint::Ankle) => "BLA (Back Left Ankle)",
            (LegId::BackRight, Joint::Hip) => "BRH (Back Right Hip)",
            (LegId::BackRight, Joint::Ankle) => "BRA (Back Right Ankle)",
        }
    }

    /// Resolve a pose-file key, either the short code or the display label.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|id| id.code() == key || id.label() == key)
    }

    /// Position of this servo's value in the command line.
    pub fn wire_index(self) -> usize {
        self.leg.index() * 2 + self.joint.offset()
    }
}

impl fmt::Display for ServoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Row/column of a servo's control on the panel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub row: u8,
    pub column: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoDescriptor {
    pub id: ServoId,
    pub range: AngleRange,
}

impl ServoDescriptor {
    pub fn label(&self) -> &'static str {
        self.id.label()
    }

    /// Legs 1-2 occupy the left column pair, legs 3-4 the right one; each leg
    /// spans two rows with the ankle below the hip.
    pub fn grid_cell(&self) -> GridCell {
        let n = self.id.leg.number();
        let base_row = ((n - 1) % 2) * 2;
        let column = if n <= 2 { 0 } else { 4 };
        GridCell {
            row: base_row + self.id.joint.offset() as u8,
            column,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegDescriptor {
    pub leg: LegId,
    pub hip: ServoDescriptor,
    pub ankle: ServoDescriptor,
}

impl LegDescriptor {
    fn new(leg: LegId, range: AngleRange) -> Self {
        Self {
            leg,
            hip: ServoDescriptor { id: ServoId::new(leg, Joint::Hip), range },
            ankle: ServoDescriptor { id: ServoId::new(leg, Joint::Ankle), range },
        }
    }

    pub fn servos(&self) -> [&ServoDescriptor; 2] {
        [&self.hip, &self.ankle]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    legs: [LegDescriptor; 4],
}

impl Default for Topology {
    fn default() -> Self {
        Self::quadruped()
    }
}

impl Topology {
    /// Four legs with the default `[0, 180]` range on every servo.
    pub fn quadruped() -> Self {
        Self::with_range(AngleRange::default())
    }

    pub fn with_range(range: AngleRange) -> Self {
        Self { legs: LegId::ALL.map(|leg| LegDescriptor::new(leg, range)) }
    }

    pub fn legs(&self) -> &[LegDescriptor; 4] {
        &self.legs
    }

    /// Servo descriptors in wire order.
    pub fn servos(&self) -> impl Iterator<Item = &ServoDescriptor> + '_ {
        self.legs.iter().flat_map(|leg| leg.servos())
    }

    pub fn servo(&self, id: ServoId) -> &ServoDescriptor {
        let leg = &self.legs[id.leg.index()];
        match id.joint {
            Joint::Hip => &leg.hip,
            Joint::Ankle => &leg.ankle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn servos_iterate_in_wire_order() {
        let topo = Topology::quadruped();
        let codes: Vec<_> = topo.servos().map(|s| s.id.code()).collect();
        assert_eq!(codes, ["FLH", "FLA", "FRH", "FRA", "BLH", "BLA", "BRH", "BRA"]);

        for (i, servo) in topo.servos().enumerate() {
            assert_eq!(servo.id.wire_index(), i);
            assert_eq!(ServoId::ALL[i], servo.id);
        }
    }

    #[test]
    fn legs_are_numbered_front_to_back() {
        let topo = Topology::quadruped();
        let legs: Vec<_> = topo.legs().iter().map(|l| (l.leg.number(), l.leg.label())).collect();
        assert_eq!(legs, [(1, "Front Left"), (2, "Front Right"), (3, "Back Left"), (4, "Back Right")]);
    }

    #[test]
    fn keys_resolve_from_code_or_label() {
        assert_eq!(ServoId::from_key("BRA"), Some(ServoId::BRA));
        assert_eq!(ServoId::from_key("FRH (Front Right Hip)"), Some(ServoId::FRH));
        assert_eq!(ServoId::from_key("frh"), None);
        assert_eq!(ServoId::from_key("FLX"), None);
    }

    #[test]
    fn grid_places_legs_in_two_column_pairs() {
        let topo = Topology::quadruped();
        let cell = |id| topo.servo(id).grid_cell();
        assert_eq!(cell(ServoId::FLH), GridCell { row: 0, column: 0 });
        assert_eq!(cell(ServoId::FLA), GridCell { row: 1, column: 0 });
        assert_eq!(cell(ServoId::FRH), GridCell { row: 2, column: 0 });
        assert_eq!(cell(ServoId::BLH), GridCell { row: 0, column: 4 });
        assert_eq!(cell(ServoId::BRA), GridCell { row: 3, column: 4 });
    }
}
