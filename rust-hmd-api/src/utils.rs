use crate::{Matrix4, VRError};
use std::cmp;
use std::thread;
use std::time::{Duration, Instant};
use time;

/// First and longest sleep between two polls of a streaming vendor load.
pub const POLL_INITIAL_DELAY: Duration = Duration::from_millis(1);
pub const POLL_MAX_DELAY: Duration = Duration::from_millis(16);

// Returns the current time in milliseconds
pub fn timestamp() -> f64 {
    let timespec = time::get_time();
    timespec.sec as f64 * 1000.0 + (timespec.nsec as f64 * 1e-6)
}

/// Calls `poll` on the current thread until it yields a value.
///
/// `Ok(None)` means the vendor is still loading: sleep with exponential
/// backoff and retry. Errors end the loop at once. This blocks the caller
/// and never spawns work elsewhere.
pub fn poll_until_ready<T, F>(timeout: Duration, mut poll: F) -> Result<T, VRError>
    where F: FnMut() -> Result<Option<T>, VRError> {
    let deadline = Instant::now() + timeout;
    let mut delay = POLL_INITIAL_DELAY;
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        if let Some(value) = poll()? {
            if attempts > 1 {
                debug!("Vendor load ready after {} polls", attempts);
            }
            return Ok(value);
        }
        if Instant::now() >= deadline {
            return Err(VRError::RenderModelTimeout);
        }
        thread::sleep(delay);
        delay = cmp::min(delay * 2, POLL_MAX_DELAY);
    }
}

/// Whole milliseconds from `now` to `target` (both in seconds), never negative
pub fn millis_until(target: f64, now: f64) -> i32 {
    let ms = (1000.0 * (target - now)).floor();
    if ms > 0.0 { ms as i32 } else { 0 }
}

/// Time left for background work once `margin_ms` is kept for the frame itself
pub fn incubation_budget(time_until_next_frame: i32, margin_ms: i32) -> i32 {
    cmp::max(0, time_until_next_frame - margin_ms)
}

// Multiply 4x4 matrices, out = a * b
pub fn multiply_matrix(a: &Matrix4, b: &Matrix4, out: &mut Matrix4) {
    let mut tmp = [0f32; 16];
    for col in 0..4 {
        for row in 0..4 {
            tmp[col * 4 + row] = (0..4).map(|k| a[k * 4 + row] * b[col * 4 + k]).sum();
        }
    }
    *out = tmp;
}

pub fn multiply(a: &Matrix4, b: &Matrix4) -> Matrix4 {
    let mut out = [0f32; 16];
    multiply_matrix(a, b, &mut out);
    out
}

/// Inverse of a rotation plus translation
pub fn rigid_inverse(m: &Matrix4) -> Matrix4 {
    let mut out: Matrix4 = identity_matrix!();
    for col in 0..3 {
        for row in 0..3 {
            out[col * 4 + row] = m[row * 4 + col];
        }
    }
    for row in 0..3 {
        out[12 + row] = -(0..3).map(|k| m[row * 4 + k] * m[12 + k]).sum::<f32>();
    }
    out
}

/// Row-major 3x4 affine (OpenVR layout) to column-major 4x4 with a `[0, 0, 0, 1]` bottom row
pub fn matrix_from_rows_3x4(m: &[[f32; 4]; 3]) -> Matrix4 {
    [m[0][0], m[1][0], m[2][0], 0.0,
     m[0][1], m[1][1], m[2][1], 0.0,
     m[0][2], m[1][2], m[2][2], 0.0,
     m[0][3], m[1][3], m[2][3], 1.0]
}

/// Row-major 4x4 to column-major, bottom row kept as is
pub fn matrix_from_rows_4x4(m: &[[f32; 4]; 4]) -> Matrix4 {
    let mut out = [0f32; 16];
    for row in 0..4 {
        for col in 0..4 {
            out[col * 4 + row] = m[row][col];
        }
    }
    out
}

/// Rigid transform from a unit quaternion `[x, y, z, w]` and a position
pub fn matrix_from_pose(orientation: &[f32; 4], position: &[f32; 3]) -> Matrix4 {
    let [x, y, z, w] = *orientation;
    let (x2, y2, z2) = (x + x, y + y, z + z);
    let (xx, xy, xz) = (x * x2, x * y2, x * z2);
    let (yy, yz, zz) = (y * y2, y * z2, z * z2);
    let (wx, wy, wz) = (w * x2, w * y2, w * z2);

    [1.0 - (yy + zz), xy + wz, xz - wy, 0.0,
     xy - wz, 1.0 - (xx + zz), yz + wx, 0.0,
     xz + wy, yz - wx, 1.0 - (xx + yy), 0.0,
     position[0], position[1], position[2], 1.0]
}

pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4 {
    let mut out: Matrix4 = identity_matrix!();
    out[12] = x;
    out[13] = y;
    out[14] = z;
    out
}

/// OpenGL frustum from the tangents of the half angles of a field of view
pub fn frustum_from_tangents(up: f32, down: f32, left: f32, right: f32, near: f32, far: f32) -> Matrix4 {
    let x_scale = 2.0 / (left + right);
    let y_scale = 2.0 / (up + down);
    let x_offset = (right - left) / (left + right);
    let y_offset = (up - down) / (up + down);

    [x_scale, 0.0, 0.0, 0.0,
     0.0, y_scale, 0.0, 0.0,
     x_offset, y_offset, -(far + near) / (far - near), -1.0,
     0.0, 0.0, -2.0 * far * near / (far - near), 0.0]
}

/// True if the bottom row of `m` is `[0, 0, 0, 1]`
pub fn is_affine(m: &Matrix4) -> bool {
    m[3] == 0.0 && m[7] == 0.0 && m[11] == 0.0 && m[15] == 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &Matrix4, b: &Matrix4) {
        for i in 0..16 {
            assert!((a[i] - b[i]).abs() < 1e-5, "index {}: {} != {}", i, a[i], b[i]);
        }
    }

    #[test]
    fn openvr_rows_become_columns() {
        let rows = [[1.0, 0.0, 0.0, 0.5],
                    [0.0, 1.0, 0.0, 1.6],
                    [0.0, 0.0, 1.0, -2.0]];
        let m = matrix_from_rows_3x4(&rows);
        assert_eq!(&m[12..16], &[0.5, 1.6, -2.0, 1.0]);
        assert!(is_affine(&m));
    }

    #[test]
    fn rigid_inverse_undoes_pose() {
        // Quarter turn about +Y, standing at (1, 2, 3)
        let pose = matrix_from_pose(&[0.0, 0.70710677, 0.0, 0.70710677], &[1.0, 2.0, 3.0]);
        let expected = [0.0, 0.0, 1.0, 0.0,
                        0.0, 1.0, 0.0, 0.0,
                        -1.0, 0.0, 0.0, 0.0,
                        3.0, -2.0, -1.0, 1.0];
        assert_close(&rigid_inverse(&pose), &expected);

        let identity: Matrix4 = identity_matrix!();
        assert_close(&multiply(&pose, &rigid_inverse(&pose)), &identity);
    }

    #[test]
    fn symmetric_frustum_has_no_offset() {
        let p = frustum_from_tangents(1.0, 1.0, 1.0, 1.0, 0.1, 1000.0);
        assert_eq!(p[0], 1.0);
        assert_eq!(p[5], 1.0);
        assert_eq!(p[8], 0.0);
        assert_eq!(p[11], -1.0);
        assert!(!is_affine(&p));
    }

    #[test]
    fn timing_helpers_clamp_at_zero() {
        assert_eq!(millis_until(1.0115, 1.0), 11);
        assert_eq!(millis_until(0.9, 1.0), 0);
        assert_eq!(incubation_budget(11, 6), 5);
        assert_eq!(incubation_budget(4, 6), 0);
    }

    #[test]
    fn poll_retries_while_loading() {
        let mut remaining = 3;
        let value = poll_until_ready(Duration::from_secs(1), || {
            if remaining == 0 {
                Ok(Some(42))
            } else {
                remaining -= 1;
                Ok(None)
            }
        });
        assert_eq!(value, Ok(42));
    }

    #[test]
    fn poll_stops_on_error_and_timeout() {
        let failed: Result<u32, _> = poll_until_ready(Duration::from_secs(1), || {
            Err(VRError::RenderModel("missing".into()))
        });
        assert_eq!(failed, Err(VRError::RenderModel("missing".into())));

        let pending: Result<u32, _> = poll_until_ready(Duration::from_millis(5), || Ok(None));
        assert_eq!(pending, Err(VRError::RenderModelTimeout));
    }
}
