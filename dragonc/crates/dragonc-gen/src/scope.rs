//! Lexical scope tracking for the code generator.
//!
//! Storage for locals is the stack: every declaration pushes one 8-byte
//! slot and is addressed at a fixed `%rbp`-relative offset afterwards.
//! The scope stack maps names to those offsets, one frame per lexical
//! block, so shadowing and block-exit slot reuse fall out of plain
//! push/pop discipline.

use indexmap::IndexMap;

use crate::error::{CodeGenError, Result};

/// Size of one local variable slot in bytes.
pub const SLOT_SIZE: i64 = 8;

/// A stack of scope frames mapping names to `%rbp`-relative offsets.
///
/// The *stack index* is the offset the next declaration will receive; it
/// starts at `-8` (one slot below the saved `%rbp`) and decreases by 8
/// per declaration. Exiting a frame gives its slots back, so sibling
/// scopes reuse them.
///
/// Frames use [`IndexMap`] so iteration order - and with it everything
/// the generator emits or reports - is deterministic.
#[derive(Debug)]
pub struct ScopeStack {
    /// Innermost frame last.
    frames: Vec<IndexMap<String, i64>>,

    /// Offset assigned to the next declaration.
    stack_index: i64,
}

impl ScopeStack {
    /// Creates an empty scope stack. The caller enters the function's
    /// outermost frame before declaring anything.
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            stack_index: -SLOT_SIZE,
        }
    }

    /// Pushes a fresh innermost frame.
    pub fn enter(&mut self) {
        self.frames.push(IndexMap::new());
    }

    /// Pops the innermost frame, returning how many slots it held.
    ///
    /// The stack index moves back up by the same amount; the caller
    /// emits the matching `%rsp` adjustment.
    pub fn exit(&mut self) -> usize {
        let frame = self.frames.pop().unwrap_or_default();
        let slots = frame.len();
        self.stack_index += SLOT_SIZE * slots as i64;
        slots
    }

    /// Whether the innermost frame already declares `name`.
    pub fn declared_in_current(&self, name: &str) -> bool {
        self.frames
            .last()
            .is_some_and(|frame| frame.contains_key(name))
    }

    /// Records a declaration in the innermost frame.
    ///
    /// Fails on redeclaration within that frame; shadowing an outer
    /// frame is fine. Returns the slot offset assigned to the name.
    pub fn declare(&mut self, name: &str) -> Result<i64> {
        if self.declared_in_current(name) {
            return Err(CodeGenError::Redeclaration {
                name: name.to_string(),
            });
        }
        let offset = self.stack_index;
        self.stack_index -= SLOT_SIZE;
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string(), offset);
        }
        Ok(offset)
    }

    /// Resolves a name, walking frames innermost to outermost.
    pub fn resolve(&self, name: &str) -> Result<i64> {
        for frame in self.frames.iter().rev() {
            if let Some(&offset) = frame.get(name) {
                return Ok(offset);
            }
        }
        Err(CodeGenError::UndeclaredVariable {
            name: name.to_string(),
        })
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}
