//! Async file I/O: one background thread pulling read requests off a queue
//! and pushing completed byte buffers onto a completion queue. The simulation
//! thread never blocks on disk; it drains completions at the top of its tick.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

pub struct ReadRequest {
    pub hash: u32,
    pub path: PathBuf,
}

pub struct ReadCompletion {
    pub hash: u32,
    pub path: PathBuf,
    pub result: anyhow::Result<Vec<u8>>,
}

pub struct AsyncFileLoader {
    tx: Option<Sender<ReadRequest>>,
    done_rx: Receiver<ReadCompletion>,
    worker: Option<JoinHandle<()>>,
}

impl AsyncFileLoader {
    #[must_use]
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel::<ReadRequest>();
        let (done_tx, done_rx) = mpsc::channel::<ReadCompletion>();
        let worker = std::thread::Builder::new()
            .name("asset-io".into())
            .spawn(move || {
                while let Ok(req) = rx.recv() {
                    let result = std::fs::read(&req.path).map_err(|e| {
                        anyhow::anyhow!("read {}: {e}", req.path.display())
                    });
                    if done_tx
                        .send(ReadCompletion {
                            hash: req.hash,
                            path: req.path,
                            result,
                        })
                        .is_err()
                    {
                        break;
                    }
                }
            })
            .expect("spawn asset-io thread");
        Self {
            tx: Some(tx),
            done_rx,
            worker: Some(worker),
        }
    }

    /// Queue a read. Returns false if the I/O thread is gone (shutdown).
    #[must_use]
    pub fn submit(&self, req: ReadRequest) -> bool {
        self.tx.as_ref().is_some_and(|tx| tx.send(req).is_ok())
    }

    /// Non-blocking drain of finished reads.
    #[must_use]
    pub fn drain_completions(&self) -> Vec<ReadCompletion> {
        let mut out = Vec::new();
        while let Ok(c) = self.done_rx.try_recv() {
            out.push(c);
        }
        out
    }
}

impl Drop for AsyncFileLoader {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop.
        drop(self.tx.take());
        if let Some(h) = self.worker.take() {
            let _ = h.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_complete_off_thread() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("a.bin");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"payload").unwrap();
        drop(f);

        let io = AsyncFileLoader::spawn();
        assert!(io.submit(ReadRequest {
            hash: 1,
            path: path.clone(),
        }));
        assert!(io.submit(ReadRequest {
            hash: 2,
            path: dir.path().join("missing.bin"),
        }));

        let mut got = Vec::new();
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while got.len() < 2 && std::time::Instant::now() < deadline {
            got.extend(io.drain_completions());
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        assert_eq!(got.len(), 2);
        let ok = got.iter().find(|c| c.hash == 1).unwrap();
        assert_eq!(ok.result.as_ref().unwrap(), b"payload");
        let missing = got.iter().find(|c| c.hash == 2).unwrap();
        assert!(missing.result.is_err());
    }
}
