use super::MotorMix;

/// Quad-X in MultiWii motor order.
///
/// ```text
/// 4cw   2ccw
///    \ /
///     ^
///    / \
/// 3ccw  1cw
/// ```
pub const QUAD_X_MW: [MotorMix; 4] = [
    // Rear right
    MotorMix::new(1, -1, 1, 1),
    // Front right
    MotorMix::new(1, -1, -1, -1),
    // Rear left
    MotorMix::new(1, 1, 1, -1),
    // Front left
    MotorMix::new(1, 1, -1, 1),
];
