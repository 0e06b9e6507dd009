//! Named-pipe PHY: the reference transport used by the CLI and by
//! local two-process tests. A pair of processes agree on two FIFO
//! paths and simply swap which one is "rx" and which is "tx".

use std::ffi::CString;
use std::fs::File;
use std::io::{Read, Write};
use std::os::unix::io::{AsRawFd, FromRawFd, RawFd};
use std::path::Path;

use rpc_core::error::LinkError;
use rpc_core::phy::Phy;

pub struct NamedPipePhy {
    rx: File,
    tx: File,
}

impl NamedPipePhy {
    /// Creates (if needed) and opens `rx_path`/`tx_path` as a FIFO pair.
    /// Both ends are opened `O_RDWR` so neither side blocks in `open(2)`
    /// waiting for a peer to show up on the other end — the one POSIX
    /// quirk of FIFOs that would otherwise make this ordering-sensitive.
    pub fn open(rx_path: impl AsRef<Path>, tx_path: impl AsRef<Path>) -> Result<Self, LinkError> {
        let rx_path = rx_path.as_ref();
        let tx_path = tx_path.as_ref();
        ensure_fifo(rx_path)?;
        ensure_fifo(tx_path)?;

        let rx_fd = open_rdwr(rx_path, true)?;
        let tx_fd = open_rdwr(tx_path, false)?;

        // SAFETY: both descriptors were just returned by a successful
        // open(2) above and are not aliased anywhere else in the process.
        let rx = unsafe { File::from_raw_fd(rx_fd) };
        let tx = unsafe { File::from_raw_fd(tx_fd) };
        Ok(NamedPipePhy { rx, tx })
    }
}

fn path_to_cstring(path: &Path) -> Result<CString, LinkError> {
    CString::new(path.to_string_lossy().as_bytes()).map_err(|_| LinkError::Phy)
}

fn ensure_fifo(path: &Path) -> Result<(), LinkError> {
    let c_path = path_to_cstring(path)?;
    // SAFETY: `c_path` is a valid NUL-terminated string for the
    // duration of the call.
    let ret = unsafe { libc::mkfifo(c_path.as_ptr(), 0o600) };
    if ret == 0 {
        return Ok(());
    }
    let errno = std::io::Error::last_os_error();
    if errno.raw_os_error() == Some(libc::EEXIST) {
        Ok(())
    } else {
        Err(LinkError::Phy)
    }
}

fn open_rdwr(path: &Path, nonblocking: bool) -> Result<RawFd, LinkError> {
    let c_path = path_to_cstring(path)?;
    let mut flags = libc::O_RDWR;
    if nonblocking {
        flags |= libc::O_NONBLOCK;
    }
    // SAFETY: `c_path` is valid for the duration of the call; the
    // returned fd is checked for -1 before use.
    let fd = unsafe { libc::open(c_path.as_ptr(), flags) };
    if fd < 0 {
        return Err(LinkError::Phy);
    }
    Ok(fd)
}

fn poll_readable(fd: RawFd, timeout_ms: i32) -> Result<bool, LinkError> {
    let mut pfd = libc::pollfd { fd, events: libc::POLLIN, revents: 0 };
    // SAFETY: `pfd` is a valid, single-element array for the call's
    // duration.
    let ret = unsafe { libc::poll(&mut pfd as *mut libc::pollfd, 1, timeout_ms) };
    if ret < 0 {
        return Err(LinkError::Phy);
    }
    Ok(ret > 0 && (pfd.revents & libc::POLLIN) != 0)
}

impl Phy for NamedPipePhy {
    fn send(&self, bytes: &[u8]) -> Result<(), LinkError> {
        (&self.tx).write_all(bytes).map_err(|_| LinkError::Phy)
    }

    fn recv_byte(&self, timeout_ms: Option<u64>) -> Result<Option<u8>, LinkError> {
        let poll_timeout = match timeout_ms {
            None => -1,
            Some(ms) => ms.min(i32::MAX as u64) as i32,
        };
        if !poll_readable(self.rx.as_raw_fd(), poll_timeout)? {
            return Ok(None);
        }
        let mut byte = [0u8; 1];
        match (&self.rx).read(&mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            Err(_) => Err(LinkError::Phy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn tmp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("rpc-phy-pipe-test-{}-{name}", std::process::id()))
    }

    #[test]
    fn round_trips_bytes_between_two_ends() {
        let a_to_b = tmp_path("a-to-b");
        let b_to_a = tmp_path("b-to-a");

        let server = Arc::new(NamedPipePhy::open(&b_to_a, &a_to_b).unwrap());
        let client = Arc::new(NamedPipePhy::open(&a_to_b, &b_to_a).unwrap());

        let s2 = server.clone();
        let handle = thread::spawn(move || {
            let byte = s2.recv_byte(Some(2000)).unwrap();
            assert_eq!(byte, Some(0xAB));
            s2.send(&[0xCD]).unwrap();
        });

        client.send(&[0xAB]).unwrap();
        let reply = client.recv_byte(Some(2000)).unwrap();
        assert_eq!(reply, Some(0xCD));
        handle.join().unwrap();

        let _ = std::fs::remove_file(&a_to_b);
        let _ = std::fs::remove_file(&b_to_a);
    }

    #[test]
    fn recv_byte_times_out_when_nothing_arrives() {
        let a_to_b = tmp_path("idle-a-to-b");
        let b_to_a = tmp_path("idle-b-to-a");
        let phy = NamedPipePhy::open(&a_to_b, &b_to_a).unwrap();
        assert_eq!(phy.recv_byte(Some(30)).unwrap(), None);
        let _ = std::fs::remove_file(&a_to_b);
        let _ = std::fs::remove_file(&b_to_a);
    }
}
