//! Camera reprojection, i.e. finding out where each pixel was located in the
//! previous frame.

use glam::{UVec2, Vec2, Vec4Swizzles};

use crate::{
    BilinearFilter, Camera, Reprojection, SurfaceMap, TexRgba32,
    REPROJECTION_SNAP,
};

pub fn main(
    screen_pos: UVec2,
    prev_camera: &Camera,
    surface_map: SurfaceMap,
    prev_surface_map: SurfaceMap,
    position_map: TexRgba32,
) -> Reprojection {
    let surface = surface_map.get(screen_pos);

    if surface.is_sky() {
        return Default::default();
    }

    let position = position_map.read(screen_pos).xyz();

    let Some(prev_screen_pos) = prev_camera.world_to_screen(position) else {
        return Default::default();
    };

    if !prev_screen_pos.is_finite()
        || !prev_camera.contains(prev_screen_pos.floor().as_ivec2())
    {
        // Reprojected point is located outside of the previous viewport (e.g.
        // this will happen to some of the points on the left side of the
        // screen if the camera strafes to right)
        return Default::default();
    }

    let prev_pos = {
        let pos = prev_screen_pos - 0.5;
        let pos_round = pos.round();

        Vec2::select(
            (pos - pos_round).abs().cmple(Vec2::splat(REPROJECTION_SNAP)),
            pos_round,
            pos,
        )
    };

    let mut reprojection = Reprojection {
        prev_x: prev_pos.x,
        prev_y: prev_pos.y,
        confidence: 0.0,
        validity: 0,
    };

    let weights =
        BilinearFilter::tap_weights(reprojection.prev_pos_fract()).to_array();

    let coords = BilinearFilter::reprojection_coords(prev_pos.x, prev_pos.y);

    for (idx, (pos, weight)) in coords.into_iter().zip(weights).enumerate() {
        if weight <= 0.0 || !prev_surface_map.contains(pos) {
            continue;
        }

        // Check if the pixel we're looking at shades the same surface; if it
        // doesn't, reusing its history would bleed disoccluded pixels
        if surface.is_similar_to(&prev_surface_map.get(pos.as_uvec2())) {
            reprojection.validity |= 1 << idx;
            reprojection.confidence += weight;
        }
    }

    reprojection
}
