//! # Spending Conditions
//!
//! A [`Script`] is an opaque byte string. This module only knows enough of
//! the instruction format to walk pushes and recognize the standard output
//! templates; evaluating scripts is the verifier's job.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};

use crate::errors::TypesError;
use crate::hashes::PubKeyHash;

pub mod opcodes {
    pub const OP_0: u8 = 0x00;
    pub const OP_PUSHDATA1: u8 = 0x4c;
    pub const OP_PUSHDATA2: u8 = 0x4d;
    pub const OP_PUSHDATA4: u8 = 0x4e;
    pub const OP_1NEGATE: u8 = 0x4f;
    pub const OP_1: u8 = 0x51;
    pub const OP_16: u8 = 0x60;
    pub const OP_RETURN: u8 = 0x6a;
    pub const OP_DUP: u8 = 0x76;
    pub const OP_EQUAL: u8 = 0x87;
    pub const OP_EQUALVERIFY: u8 = 0x88;
    pub const OP_HASH160: u8 = 0xa9;
    pub const OP_CHECKSIG: u8 = 0xac;
}

use opcodes::*;

/// Scripts above this size can never be spent.
pub const MAX_SCRIPT_SIZE: usize = 10_000;

/// Recognized output templates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScriptType {
    PubKeyHash,
    ScriptHash,
    WitnessV0KeyHash,
    WitnessV0ScriptHash,
    NullData,
    NonStandard,
}

/// One decoded script element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction<'a> {
    /// Data push (including the empty push `OP_0`).
    Push(&'a [u8]),
    /// Any non-push opcode.
    Op(u8),
}

/// Spending condition or unlocking script bytes.
#[serde_as]
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Script(#[serde_as(as = "Hex")] pub Vec<u8>);

impl Script {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `DUP HASH160 <20> EQUALVERIFY CHECKSIG`
    pub fn new_p2pkh(hash: &PubKeyHash) -> Self {
        let mut bytes = Vec::with_capacity(25);
        bytes.extend_from_slice(&[OP_DUP, OP_HASH160, 20]);
        bytes.extend_from_slice(&hash.0);
        bytes.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
        Self(bytes)
    }

    /// `0 <20>`
    pub fn new_p2wpkh(hash: &PubKeyHash) -> Self {
        let mut bytes = Vec::with_capacity(22);
        bytes.extend_from_slice(&[OP_0, 20]);
        bytes.extend_from_slice(&hash.0);
        Self(bytes)
    }

    /// `RETURN <data>`
    pub fn new_op_return(data: &[u8]) -> Self {
        let mut builder = ScriptBuilder::new();
        builder.push_opcode(OP_RETURN);
        builder.push_slice(data);
        builder.into_script()
    }

    /// Builds an unlocking script that pushes each item in order.
    pub fn from_pushes<'a>(items: impl IntoIterator<Item = &'a [u8]>) -> Self {
        let mut builder = ScriptBuilder::new();
        for item in items {
            builder.push_slice(item);
        }
        builder.into_script()
    }

    /// Iterates over the script's instructions.
    pub fn instructions(&self) -> Instructions<'_> {
        Instructions {
            bytes: &self.0,
            offset: 0,
        }
    }

    /// True when every instruction is a push (opcodes up to `OP_16`).
    pub fn is_push_only(&self) -> bool {
        self.instructions().all(|ins| match ins {
            Ok(Instruction::Push(_)) => true,
            Ok(Instruction::Op(op)) => op <= OP_16,
            Err(_) => false,
        })
    }

    /// Outputs that can provably never be spent.
    pub fn is_unspendable(&self) -> bool {
        self.0.first() == Some(&OP_RETURN) || self.0.len() > MAX_SCRIPT_SIZE
    }

    /// Returns the committed key hash for key-hash templates.
    pub fn key_hash(&self) -> Option<PubKeyHash> {
        let range = match self.script_type() {
            ScriptType::PubKeyHash => 3..23,
            ScriptType::WitnessV0KeyHash => 2..22,
            _ => return None,
        };
        let mut out = [0u8; 20];
        out.copy_from_slice(&self.0[range]);
        Some(PubKeyHash(out))
    }

    pub fn is_witness_program(&self) -> bool {
        matches!(
            self.script_type(),
            ScriptType::WitnessV0KeyHash | ScriptType::WitnessV0ScriptHash
        )
    }

    /// Classifies the script against the standard output templates.
    pub fn script_type(&self) -> ScriptType {
        let b = &self.0;
        match b.len() {
            25 if b[0] == OP_DUP
                && b[1] == OP_HASH160
                && b[2] == 20
                && b[23] == OP_EQUALVERIFY
                && b[24] == OP_CHECKSIG =>
            {
                ScriptType::PubKeyHash
            }
            23 if b[0] == OP_HASH160 && b[1] == 20 && b[22] == OP_EQUAL => ScriptType::ScriptHash,
            22 if b[0] == OP_0 && b[1] == 20 => ScriptType::WitnessV0KeyHash,
            34 if b[0] == OP_0 && b[1] == 32 => ScriptType::WitnessV0ScriptHash,
            _ if b.first() == Some(&OP_RETURN) && Script(b[1..].to_vec()).is_push_only() => {
                ScriptType::NullData
            }
            _ => ScriptType::NonStandard,
        }
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", hex::encode(&self.0))
    }
}

/// Iterator over script instructions; yields an error and stops on a
/// truncated push.
pub struct Instructions<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Instructions<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], TypesError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(TypesError::TruncatedPush {
                offset: self.offset,
            })?;
        let data = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(data)
    }

    fn read_len(&mut self, width: usize) -> Result<usize, TypesError> {
        let raw = self.take(width)?;
        let mut buf = [0u8; 4];
        buf[..width].copy_from_slice(raw);
        Ok(u32::from_le_bytes(buf) as usize)
    }
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Result<Instruction<'a>, TypesError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.bytes.len() {
            return None;
        }
        let op = self.bytes[self.offset];
        self.offset += 1;

        let len = match op {
            0x01..=0x4b => Ok(op as usize),
            OP_PUSHDATA1 => self.read_len(1),
            OP_PUSHDATA2 => self.read_len(2),
            OP_PUSHDATA4 => self.read_len(4),
            OP_0 => return Some(Ok(Instruction::Push(&[]))),
            _ => return Some(Ok(Instruction::Op(op))),
        };

        let result = len.and_then(|len| self.take(len)).map(Instruction::Push);
        if result.is_err() {
            // Stop iteration after a malformed push.
            self.offset = self.bytes.len();
        }
        Some(result)
    }
}

/// Minimal-push script builder.
#[derive(Debug, Default)]
pub struct ScriptBuilder {
    bytes: Vec<u8>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_opcode(&mut self, op: u8) -> &mut Self {
        self.bytes.push(op);
        self
    }

    pub fn push_slice(&mut self, data: &[u8]) -> &mut Self {
        match data.len() {
            0 => self.bytes.push(OP_0),
            n @ 1..=0x4b => self.bytes.push(n as u8),
            n @ 0x4c..=0xff => {
                self.bytes.push(OP_PUSHDATA1);
                self.bytes.push(n as u8);
            }
            n @ 0x100..=0xffff => {
                self.bytes.push(OP_PUSHDATA2);
                self.bytes.extend_from_slice(&(n as u16).to_le_bytes());
            }
            n => {
                self.bytes.push(OP_PUSHDATA4);
                self.bytes.extend_from_slice(&(n as u32).to_le_bytes());
            }
        }
        self.bytes.extend_from_slice(data);
        self
    }

    pub fn into_script(self) -> Script {
        Script(self.bytes)
    }
}
