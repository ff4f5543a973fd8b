// SPDX-License-Identifier: Apache-2.0

//! The fixed set of ten two-input boolean operators applied bitwise to 4-bit
//! operands, and the chaining rule used for three-element selections.

use crate::selector::Selection;

pub const NIBBLE_MASK: u8 = 0xF;
pub const OP_COUNT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum BoolOp {
    And = 0,
    Or = 1,
    Imply = 2,
    Conv = 3,
    Xor = 4,
    Xnor = 5,
    Nand = 6,
    Nor = 7,
    Nimply = 8,
    Inv = 9,
}

/// All operators in id order; index `i` holds the operator with id `i`.
pub const ALL_OPS: [BoolOp; OP_COUNT] = [
    BoolOp::And,
    BoolOp::Or,
    BoolOp::Imply,
    BoolOp::Conv,
    BoolOp::Xor,
    BoolOp::Xnor,
    BoolOp::Nand,
    BoolOp::Nor,
    BoolOp::Nimply,
    BoolOp::Inv,
];

impl BoolOp {
    pub fn from_id(id: u8) -> Option<BoolOp> {
        ALL_OPS.get(id as usize).copied()
    }

    /// Decodes an operator-counter value, treating ids outside `[0, 9]` as
    /// XOR.
    pub fn decode(id: u8) -> BoolOp {
        BoolOp::from_id(id).unwrap_or(BoolOp::Xor)
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            BoolOp::And => "AND",
            BoolOp::Or => "OR",
            BoolOp::Imply => "IMPLY",
            BoolOp::Conv => "CONV",
            BoolOp::Xor => "XOR",
            BoolOp::Xnor => "XNOR",
            BoolOp::Nand => "NAND",
            BoolOp::Nor => "NOR",
            BoolOp::Nimply => "NIMPLY",
            BoolOp::Inv => "INV",
        }
    }

    /// Applies the operator bitwise to the low four bits of `a` and `b`.
    pub fn apply(self, a: u8, b: u8) -> u8 {
        let a = a & NIBBLE_MASK;
        let b = b & NIBBLE_MASK;
        let not_a = !a & NIBBLE_MASK;
        let not_b = !b & NIBBLE_MASK;
        let result = match self {
            BoolOp::And => a & b,
            BoolOp::Or => a | b,
            // a -> b
            BoolOp::Imply => not_a | b,
            // b -> a
            BoolOp::Conv => not_b | a,
            BoolOp::Xor => a ^ b,
            BoolOp::Xnor => !(a ^ b),
            BoolOp::Nand => !(a & b),
            BoolOp::Nor => !(a | b),
            // ~(a -> b)
            BoolOp::Nimply => a & not_b,
            // ~(b -> a)
            BoolOp::Inv => b & not_a,
        };
        result & NIBBLE_MASK
    }
}

impl std::fmt::Display for BoolOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for BoolOp {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_OPS
            .iter()
            .copied()
            .find(|op| op.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("invalid boolean operator: {}", s))
    }
}

/// Combinational network: `op1(sel[0], sel[1])` for two-element selections,
/// `op2(op1(sel[0], sel[1]), sel[2])` for three-element selections.
pub fn evaluate(selection: &Selection, op1: BoolOp, op2: BoolOp) -> u8 {
    let values = selection.values();
    let first = op1.apply(values[0], values[1]);
    match values.get(2) {
        Some(&c) => op2.apply(first, c),
        None => first,
    }
}
