//! Batching fuzzer.
//!
//! Feeds arbitrary SQL text and batch sizes through `batch_queries`. Every
//! statement that parses must print to a fixed point, and the batched output
//! must carry the same rows per table, in the same order, as the input.

use honggfuzz::fuzz;
use sql_batcher::testing::check_batch;

fn main() {
    loop {
        fuzz!(|input: (String, u8)| {
            let (sql, batch_size) = input;
            check_batch(&sql, batch_size);
        });
    }
}
