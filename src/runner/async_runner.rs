use std::collections::hash_map::DefaultHasher;
use std::error::Error;
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{
    csv_utils::write_csv,
    dto::{Assessment, CardKey, Payment},
    Engine, Error as VelocityError, VelocityStore,
};

use chrono::TimeDelta;
use csv_async::{AsyncReaderBuilder, Error as CsvError, Trim};
use tokio::fs::File;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tracing::info;

const BUFFER_SIZE: usize = 1024;
const WORKERS: usize = 4;

type Result<T, E = Box<dyn Error + Send + Sync>> = std::result::Result<T, E>;

/// Tagged with the position in the input, so output order can be restored.
type Sequenced<T> = (usize, T);

/// Replays a payments file async through one shared velocity store and writes
/// one assessment per payment, in input order, to the provided writer.
/// Spawns:
/// * CSV reader - streams payments from the input file and routes each one to a
///   worker chosen by its card, so every card is handled by exactly one worker.
/// * Workers - assess the payments they receive, in arrival order, until their
///   channel is closed. Distinct cards are assessed concurrently.
///
/// Output is identical to the synchronous runner's.
///
/// # Arguments
/// * `input_path` - Path to the input CSV file containing payments
/// * `window` - Usage window each payment is assessed against
/// * `writer` - Where to write the assessments (e.g. stdout)
///
/// # Errors
/// Returns an error if:
/// * The window is negative
/// * The input file cannot be read
/// * The CSV is malformed
/// * Writing to the output fails
pub async fn run<P, W>(input_path: P, window: TimeDelta, writer: W) -> Result<()>
where
    P: AsRef<Path>,
    W: Write,
{
    let engine = Engine::new(Arc::new(VelocityStore::new()), window)?;
    let input_path = input_path.as_ref().to_owned();

    let mut senders = Vec::with_capacity(WORKERS);
    let mut worker_handles = Vec::with_capacity(WORKERS);
    for _ in 0..WORKERS {
        let (tx, rx) = mpsc::channel(BUFFER_SIZE);
        senders.push(tx);
        worker_handles.push(tokio::spawn(assess_payments(engine.clone(), rx)));
    }
    let reader_handle = tokio::spawn(read_payments(input_path, senders));

    // Wait for reader to finish and propagate any errors
    reader_handle.await??;

    let mut assessments = Vec::new();
    for handle in worker_handles {
        assessments.extend(handle.await??);
    }
    assessments.sort_unstable_by_key(|(seq, _)| *seq);
    info!(
        payments = assessments.len(),
        cards = engine.provider().tracked_cards(),
        workers = WORKERS,
        "Replay finished"
    );

    write_csv(writer, assessments.into_iter().map(|(_, assessment)| assessment))?;
    Ok(())
}

/// Picks the worker responsible for a card.
fn worker_for(card: &CardKey, workers: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    card.hash(&mut hasher);
    (hasher.finish() % workers as u64) as usize
}

/// Reads and deserializes payments from a CSV file.
/// Routes them through the worker channels, keyed by card.
async fn read_payments(
    input_path: PathBuf,
    workers: Vec<mpsc::Sender<Sequenced<Payment>>>,
) -> Result<(), CsvError> {
    let file = File::open(input_path).await?;
    let mut csv_reader = AsyncReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .create_deserializer(file);

    let mut records = csv_reader.deserialize::<Payment>();
    let mut seq = 0;
    while let Some(result) = records.next().await {
        // CSV parsing errors are critical - propagate them
        let payment = result?;
        let worker = &workers[worker_for(&payment.card, workers.len())];
        if worker.send((seq, payment)).await.is_err() {
            // Worker dropped, exit gracefully
            break;
        }
        seq += 1;
    }
    Ok(())
}

/// Assesses payments received through the channel.
/// Returns the tagged assessments once the channel is closed by the reader.
async fn assess_payments(
    engine: Engine<VelocityStore>,
    mut rx: mpsc::Receiver<Sequenced<Payment>>,
) -> Result<Vec<Sequenced<Assessment>>, VelocityError> {
    let mut assessments = Vec::new();
    while let Some((seq, payment)) = rx.recv().await {
        assessments.push((seq, engine.assess(payment)?));
    }
    Ok(assessments)
}
