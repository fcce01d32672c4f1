//! Line-aligned output chunking.

/// Smallest accepted budget; leaves room for a truncation marker.
pub const MIN_CHUNK_BYTES: usize = 64;

/// Groups lines into chunks of at most `budget` bytes.
///
/// Every chunk ends on a line boundary. A single line too long for the
/// budget is cut short and tagged with `[... N bytes truncated]`.
#[derive(Debug)]
pub struct LineChunker {
    budget: usize,
    buffer: String,
}

impl LineChunker {
    /// Budgets below [`MIN_CHUNK_BYTES`] are raised to it.
    pub fn new(budget: usize) -> Self {
        let budget = budget.max(MIN_CHUNK_BYTES);
        Self {
            budget,
            buffer: String::with_capacity(budget),
        }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Add one line (without its terminator). Returns a finished chunk when
    /// the line does not fit behind the buffered ones.
    pub fn push_line(&mut self, line: &str) -> Option<String> {
        let line = self.fit(line);
        let ready = if self.buffer.len() + line.len() + 1 > self.budget {
            Some(std::mem::take(&mut self.buffer))
        } else {
            None
        };
        self.buffer.push_str(&line);
        self.buffer.push('\n');
        ready.filter(|chunk| !chunk.is_empty())
    }

    /// The last, partially filled chunk.
    pub fn finish(self) -> Option<String> {
        Some(self.buffer).filter(|chunk| !chunk.is_empty())
    }

    fn fit<'l>(&self, line: &'l str) -> std::borrow::Cow<'l, str> {
        if line.len() < self.budget {
            return line.into();
        }

        let widest_marker = marker(line.len()).len();
        let mut keep = self.budget - 1 - widest_marker;
        while !line.is_char_boundary(keep) {
            keep -= 1;
        }
        format!("{}{}", &line[..keep], marker(line.len() - keep)).into()
    }
}

fn marker(dropped: usize) -> String {
    format!("[... {} bytes truncated]", dropped)
}
