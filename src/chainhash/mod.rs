//! Chainhash key stretching.
//!
//! A chainhash is an iterated application of a cryptographic hash,
//! optionally mixing a deterministic salt into every round. Five modes
//! exist, tagged 1–5 in the file header:
//!
//! | Tag | Mode | Parameters |
//! |-----|------|------------|
//! | 1 | [`Normal`](ChainHashMode::Normal) | none |
//! | 2 | [`ConstantSalt`](ChainHashMode::ConstantSalt) | `S` (1–255 bytes) |
//! | 3 | [`CountSalt`](ChainHashMode::CountSalt) | `SN` (u64 start) |
//! | 4 | [`ConstantCountSalt`](ChainHashMode::ConstantCountSalt) | `SN`, `S` |
//! | 5 | [`Quadratic`](ChainHashMode::Quadratic) | `SN`, `A`, `B`, `C` |
//!
//! Counter values are rendered as the decimal ASCII of a `u64`, with
//! wrapping arithmetic throughout; clamping or binary encodings would
//! break file compatibility. String and byte-buffer inputs agree whenever
//! their byte sequences agree.
//!
//! All three entry points ([`ChainHash::perform`],
//! [`ChainHash::perform_with_timeout`], [`perform_timed`]) drive the same
//! per-iteration stepper, so a timed run that reports `n` iterations is
//! reproduced bit for bit by a plain run with `iterations = n`.

pub mod data;
pub mod format;

use std::time::Instant;

pub use data::{ChainHashData, MAX_DATABLOCK_LEN};
pub use format::{Format, NameLen};

use crate::bytes::Bytes;
use crate::error::{Error, ErrorKind, Timed};
use crate::hash::HashMode;
use crate::settings::{MAX_ITERATIONS, MIN_ITERATIONS, STANDARD_CHAINHASHMODE};
use crate::Result;

/// Chainhash mode selector, persisted in the header as a one-byte tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainHashMode {
    /// Re-hash the previous hash (tag 1).
    Normal = 1,
    /// Mix a constant salt into every round (tag 2).
    ConstantSalt = 2,
    /// Mix an incrementing decimal counter into every round (tag 3).
    CountSalt = 3,
    /// Mix both a constant salt and an incrementing counter (tag 4).
    ConstantCountSalt = 4,
    /// Mix `a*k^2 + b*k + c` of an incrementing counter `k` (tag 5).
    Quadratic = 5,
}

impl ChainHashMode {
    /// All modes, in tag order.
    pub const ALL: [ChainHashMode; 5] = [
        Self::Normal,
        Self::ConstantSalt,
        Self::CountSalt,
        Self::ConstantCountSalt,
        Self::Quadratic,
    ];

    /// Parses the one-byte tag used in the file format.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::ChainhashModeInvalid`] for tags outside 1..=5.
    pub fn from_u8(tag: u8) -> Result<Self> {
        match tag {
            1 => Ok(Self::Normal),
            2 => Ok(Self::ConstantSalt),
            3 => Ok(Self::CountSalt),
            4 => Ok(Self::ConstantCountSalt),
            5 => Ok(Self::Quadratic),
            _ => Err(Error::ctx(
                ErrorKind::ChainhashModeInvalid,
                format!("chainhash mode {tag}"),
            )),
        }
    }

    /// Returns the one-byte tag used in the file format.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// The default chainhash mode for new headers.
    pub fn standard() -> Self {
        Self::from_u8(STANDARD_CHAINHASHMODE).expect("standard chainhash mode is valid")
    }
}

/// One configured chainhash: mode, iteration count and parameter block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainHash {
    mode: ChainHashMode,
    iters: u64,
    datablock: ChainHashData,
}

impl ChainHash {
    /// Creates a chainhash record and validates it.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::IterationsInvalid`] for out-of-range iteration
    ///   counts.
    /// - [`ErrorKind::ChainhashFormatInvalid`] if the datablock was built
    ///   against a different mode's schema.
    /// - [`ErrorKind::DatablockNotComplete`] if parameters are missing.
    pub fn new(mode: ChainHashMode, iters: u64, datablock: ChainHashData) -> Result<Self> {
        let record = Self {
            mode,
            iters,
            datablock,
        };
        record.validate()?;
        Ok(record)
    }

    /// A NORMAL chainhash.
    pub fn normal(iters: u64) -> Result<Self> {
        Self::new(
            ChainHashMode::Normal,
            iters,
            ChainHashData::new(Format::for_mode(ChainHashMode::Normal)),
        )
    }

    /// A CONSTANT_SALT chainhash with the given salt bytes.
    pub fn constant_salt(iters: u64, salt: &[u8]) -> Result<Self> {
        let mut data = ChainHashData::new(Format::for_mode(ChainHashMode::ConstantSalt));
        data.add_part(Bytes::from_slice(salt))?;
        Self::new(ChainHashMode::ConstantSalt, iters, data)
    }

    /// A COUNT_SALT chainhash with the given starting counter.
    pub fn count_salt(iters: u64, start: u64) -> Result<Self> {
        let mut data = ChainHashData::new(Format::for_mode(ChainHashMode::CountSalt));
        data.add_part(Bytes::from_slice(&start.to_be_bytes()))?;
        Self::new(ChainHashMode::CountSalt, iters, data)
    }

    /// A CONSTANT_COUNT_SALT chainhash.
    pub fn constant_count_salt(iters: u64, start: u64, salt: &[u8]) -> Result<Self> {
        let mut data = ChainHashData::new(Format::for_mode(ChainHashMode::ConstantCountSalt));
        data.add_part(Bytes::from_slice(&start.to_be_bytes()))?;
        data.add_part(Bytes::from_slice(salt))?;
        Self::new(ChainHashMode::ConstantCountSalt, iters, data)
    }

    /// A QUADRATIC chainhash with counter start and coefficients.
    pub fn quadratic(iters: u64, start: u64, a: u64, b: u64, c: u64) -> Result<Self> {
        let mut data = ChainHashData::new(Format::for_mode(ChainHashMode::Quadratic));
        for v in [start, a, b, c] {
            data.add_part(Bytes::from_slice(&v.to_be_bytes()))?;
        }
        Self::new(ChainHashMode::Quadratic, iters, data)
    }

    /// Returns the chainhash mode.
    pub fn mode(&self) -> ChainHashMode {
        self.mode
    }

    /// Returns the iteration count.
    pub fn iters(&self) -> u64 {
        self.iters
    }

    /// Returns the parameter datablock.
    pub fn datablock(&self) -> &ChainHashData {
        &self.datablock
    }

    /// Re-checks the record invariants.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_ITERATIONS..=MAX_ITERATIONS).contains(&self.iters) {
            return Err(Error::ctx(
                ErrorKind::IterationsInvalid,
                format!("{} iterations", self.iters),
            ));
        }
        validate_datablock(self.mode, &self.datablock)
    }

    /// Runs the chainhash over `input`, producing a `hash_size` digest.
    pub fn perform(&self, hash: HashMode, input: &[u8]) -> Result<Bytes> {
        self.validate()?;
        let mut stepper = Stepper::start(self, hash, input)?;
        for _ in 1..self.iters {
            stepper.step();
        }
        Ok(stepper.finish())
    }

    /// Runs the chainhash under a wall-clock budget in milliseconds.
    ///
    /// A budget of zero means no budget. The elapsed time is checked
    /// between whole iterations; the current iteration always completes.
    /// On timeout the partial state is discarded and
    /// [`Timed::TimedOut`] is returned.
    pub fn perform_with_timeout(
        &self,
        hash: HashMode,
        input: &[u8],
        timeout_ms: u64,
    ) -> Result<Timed<Bytes>> {
        if timeout_ms == 0 {
            return self.perform(hash, input).map(Timed::Done);
        }
        self.validate()?;
        let begin = Instant::now();
        let mut stepper = Stepper::start(self, hash, input)?;
        for _ in 1..self.iters {
            if begin.elapsed().as_millis() >= u128::from(timeout_ms) {
                log::debug!(
                    "chainhash timed out after {}ms (mode {})",
                    timeout_ms,
                    self.mode.as_u8()
                );
                return Ok(Timed::TimedOut);
            }
            stepper.step();
        }
        Ok(Timed::Done(stepper.finish()))
    }
}

/// Runs a chainhash for as long as the wall-clock budget allows.
///
/// At least one iteration is performed; the run stops once the elapsed
/// time exceeds `budget_ms` or [`MAX_ITERATIONS`] is reached. Returns the
/// number of iterations done and the resulting digest; a plain
/// [`ChainHash::perform`] with that iteration count reproduces the digest
/// bit for bit.
pub fn perform_timed(
    mode: ChainHashMode,
    datablock: ChainHashData,
    hash: HashMode,
    input: &[u8],
    budget_ms: u64,
) -> Result<(u64, Bytes)> {
    validate_datablock(mode, &datablock)?;
    let probe = ChainHash {
        mode,
        iters: MIN_ITERATIONS,
        datablock,
    };
    let begin = Instant::now();
    let mut stepper = Stepper::start(&probe, hash, input)?;
    let mut iterations = 1u64;
    while begin.elapsed().as_millis() <= u128::from(budget_ms) && iterations < MAX_ITERATIONS {
        stepper.step();
        iterations += 1;
    }
    log::debug!(
        "timed chainhash settled on {iterations} iterations in {}ms",
        begin.elapsed().as_millis()
    );
    Ok((iterations, stepper.finish()))
}

fn validate_datablock(mode: ChainHashMode, datablock: &ChainHashData) -> Result<()> {
    if datablock.format() != Format::for_mode(mode) {
        return Err(Error::ctx(
            ErrorKind::ChainhashFormatInvalid,
            format!("datablock does not match mode {}", mode.as_u8()),
        ));
    }
    if !datablock.is_complete() {
        return Err(Error::new(ErrorKind::DatablockNotComplete));
    }
    if datablock.len() > MAX_DATABLOCK_LEN {
        return Err(Error::new(ErrorKind::DatablockTooLong));
    }
    Ok(())
}

/// Wrapping evaluation of `a*k^2 + b*k + c`, matching unsigned 64-bit
/// semantics.
fn quadratic_term(k: u64, a: u64, b: u64, c: u64) -> u64 {
    a.wrapping_mul(k)
        .wrapping_mul(k)
        .wrapping_add(b.wrapping_mul(k))
        .wrapping_add(c)
}

/// Mode-specific per-round salting.
enum Salting {
    None,
    /// Raw salt for round 0, its hash for every later round.
    Constant { salt: Bytes, salt_hash: Bytes },
    Count,
    ConstantCount { salt: Bytes, salt_hash: Bytes },
    Quadratic { a: u64, b: u64, c: u64 },
}

/// Resumable chainhash runner.
///
/// Construction performs the first iteration; each [`step`](Self::step)
/// performs one more. Every public entry point drives this type, which is
/// what makes timed runs reproducible by iteration count.
struct Stepper {
    hash: HashMode,
    salting: Salting,
    counter: u64,
    value: Bytes,
}

impl Stepper {
    fn start(record: &ChainHash, hash: HashMode, input: &[u8]) -> Result<Self> {
        let datablock = &record.datablock;
        let (salting, counter) = match record.mode {
            ChainHashMode::Normal => (Salting::None, 0),
            ChainHashMode::ConstantSalt => {
                let salt = datablock.part("S")?.clone();
                let salt_hash = hash.hash(salt.as_slice());
                (Salting::Constant { salt, salt_hash }, 0)
            }
            ChainHashMode::CountSalt => (Salting::Count, datablock.part("SN")?.to_long()?),
            ChainHashMode::ConstantCountSalt => {
                let salt = datablock.part("S")?.clone();
                let salt_hash = hash.hash(salt.as_slice());
                (
                    Salting::ConstantCount { salt, salt_hash },
                    datablock.part("SN")?.to_long()?,
                )
            }
            ChainHashMode::Quadratic => (
                Salting::Quadratic {
                    a: datablock.part("A")?.to_long()?,
                    b: datablock.part("B")?.to_long()?,
                    c: datablock.part("C")?.to_long()?,
                },
                datablock.part("SN")?.to_long()?,
            ),
        };

        let value = match &salting {
            Salting::None => hash.hash(input),
            Salting::Constant { salt, .. } => hash.hash_concat(&[input, salt.as_slice()]),
            Salting::Count => hash.hash_concat(&[input, counter.to_string().as_bytes()]),
            Salting::ConstantCount { salt, .. } => {
                hash.hash_concat(&[input, salt.as_slice(), counter.to_string().as_bytes()])
            }
            Salting::Quadratic { a, b, c } => hash.hash_concat(&[
                input,
                quadratic_term(counter, *a, *b, *c).to_string().as_bytes(),
            ]),
        };

        Ok(Self {
            hash,
            salting,
            counter,
            value,
        })
    }

    fn step(&mut self) {
        self.counter = self.counter.wrapping_add(1);
        self.value = match &self.salting {
            Salting::None => self.hash.hash(self.value.as_slice()),
            Salting::Constant { salt_hash, .. } => self
                .hash
                .hash_concat(&[self.value.as_slice(), salt_hash.as_slice()]),
            Salting::Count => {
                let counted = self.hash.hash(self.counter.to_string().as_bytes());
                self.hash
                    .hash_concat(&[self.value.as_slice(), counted.as_slice()])
            }
            Salting::ConstantCount { salt_hash, .. } => {
                let counted = self.hash.hash(self.counter.to_string().as_bytes());
                self.hash.hash_concat(&[
                    self.value.as_slice(),
                    salt_hash.as_slice(),
                    counted.as_slice(),
                ])
            }
            Salting::Quadratic { a, b, c } => {
                let term = quadratic_term(self.counter, *a, *b, *c);
                let counted = self.hash.hash(term.to_string().as_bytes());
                self.hash
                    .hash_concat(&[self.value.as_slice(), counted.as_slice()])
            }
        };
    }

    fn finish(self) -> Bytes {
        self.value
    }
}
