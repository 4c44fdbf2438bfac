use crate::error::CodecError;

/// Number of positions stored per word
const WORD_BITS: usize = 64;

/// Number of words covered by one rank directory entry
const BLOCK_WORDS: usize = 8;

/// Number of positions covered by one rank directory entry
pub const BLOCK_BITS: usize = WORD_BITS * BLOCK_WORDS;

/// Packed keep/delete bit vector with a block-level rank directory
///
/// Position `i` is kept when bit `i % 64` of word `i / 64` is set. The directory
/// holds, for every 512-bit block, the number of kept positions before it, so both
/// rank and select only touch one block of words after the directory lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeepMask {
    /// Packed bits, padding bits past `len` are zero
    words: Vec<u64>,

    /// Number of positions
    len: usize,

    /// Number of set bits
    ones: usize,

    /// Number of set bits preceding each block
    blocks: Vec<usize>,
}
impl KeepMask {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty mask with room for `positions` bits
    #[must_use]
    pub fn with_capacity(positions: usize) -> Self {
        let nwords = positions.div_ceil(WORD_BITS);
        Self {
            words: Vec::with_capacity(nwords),
            len: 0,
            ones: 0,
            blocks: Vec::with_capacity(nwords.div_ceil(BLOCK_WORDS)),
        }
    }

    /// Rebuilds a mask from packed words
    ///
    /// The caller guarantees `words.len() == len.div_ceil(64)` and zero padding.
    pub(crate) fn from_words(words: Vec<u64>, len: usize) -> Self {
        let mut blocks = Vec::with_capacity(words.len().div_ceil(BLOCK_WORDS));
        let mut ones = 0;
        for (idx, word) in words.iter().enumerate() {
            if idx % BLOCK_WORDS == 0 {
                blocks.push(ones);
            }
            ones += word.count_ones() as usize;
        }
        Self {
            words,
            len,
            ones,
            blocks,
        }
    }

    /// Appends the next position
    pub fn push(&mut self, keep: bool) {
        if self.len % BLOCK_BITS == 0 {
            self.blocks.push(self.ones);
        }
        if self.len % WORD_BITS == 0 {
            self.words.push(0);
        }
        if keep {
            let last = self.words.len() - 1;
            self.words[last] |= 1 << (self.len % WORD_BITS);
            self.ones += 1;
        }
        self.len += 1;
    }

    /// Number of original positions
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of kept positions, i.e. the length of the reduced sequence
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.ones
    }

    /// Number of deleted positions
    #[must_use]
    pub fn count_zeros(&self) -> usize {
        self.len - self.ones
    }

    /// The packed words backing the mask
    #[must_use]
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Whether position `pos` is kept, `None` past the end of the mask
    #[must_use]
    pub fn get(&self, pos: usize) -> Option<bool> {
        if pos >= self.len {
            return None;
        }
        Some((self.words[pos / WORD_BITS] >> (pos % WORD_BITS)) & 1 == 1)
    }

    /// Iterates over all positions in order
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(|pos| (self.words[pos / WORD_BITS] >> (pos % WORD_BITS)) & 1 == 1)
    }

    /// Number of kept positions in `0..=pos`
    ///
    /// For a kept position this is its 1-indexed coordinate in the reduced sequence.
    pub fn rank(&self, pos: usize) -> Result<usize, CodecError> {
        if pos >= self.len {
            return Err(CodecError::PositionOutOfRange(pos, self.len));
        }
        let word = pos / WORD_BITS;
        let block = word / BLOCK_WORDS;

        let preceding: usize = self.words[block * BLOCK_WORDS..word]
            .iter()
            .map(|w| w.count_ones() as usize)
            .sum();

        let bit = pos % WORD_BITS;
        let within = if bit == WORD_BITS - 1 {
            u64::MAX
        } else {
            (1 << (bit + 1)) - 1
        };

        Ok(self.blocks[block] + preceding + (self.words[word] & within).count_ones() as usize)
    }

    /// Original position of the `k`-th kept position (1-indexed)
    pub fn select(&self, k: usize) -> Result<usize, CodecError> {
        if k == 0 || k > self.ones {
            return Err(CodecError::OutOfRange(k, self.ones));
        }

        // first directory entry is always zero so the partition point is at least one
        let block = self.blocks.partition_point(|&count| count < k) - 1;
        let start = block * BLOCK_WORDS;

        let mut remaining = k - self.blocks[block];
        for (offset, &word) in self.words[start..].iter().enumerate() {
            let count = word.count_ones() as usize;
            if remaining <= count {
                return Ok((start + offset) * WORD_BITS + select_in_word(word, remaining));
            }
            remaining -= count;
        }
        Err(CodecError::OutOfRange(k, self.ones))
    }

    /// 0-based coordinate of an original position in the reduced sequence
    ///
    /// Returns `None` if the position was deleted or lies past the end of the mask.
    #[must_use]
    pub fn translate(&self, pos: usize) -> Option<usize> {
        match self.get(pos) {
            Some(true) => self.rank(pos).ok().map(|rank| rank - 1),
            _ => None,
        }
    }
}

impl FromIterator<bool> for KeepMask {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut mask = Self::with_capacity(iter.size_hint().0);
        iter.for_each(|keep| mask.push(keep));
        mask
    }
}

/// Bit offset of the `nth` (1-indexed) set bit of `word`
fn select_in_word(mut word: u64, nth: usize) -> usize {
    for _ in 1..nth {
        word &= word - 1;
    }
    word.trailing_zeros() as usize
}
