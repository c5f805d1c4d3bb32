use bytemuck::{Pod, Zeroable};
use glam::{vec2, vec4, IVec2, Mat4, UVec2, Vec2, Vec3, Vec4, Vec4Swizzles};

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Camera {
    pub projection_view: Mat4,
    pub screen: Vec4,
}

impl Camera {
    pub fn new(projection_view: Mat4, screen_size: UVec2) -> Self {
        Self {
            projection_view,
            screen: vec4(
                screen_size.x as f32,
                screen_size.y as f32,
                0.0,
                0.0,
            ),
        }
    }

    /// Given a point in world-coordinates, returns it in clip-coordinates.
    pub fn world_to_clip(&self, pos: Vec3) -> Vec4 {
        self.projection_view * pos.extend(1.0)
    }

    /// Given a point in world-coordinates, returns it in screen-coordinates.
    ///
    /// Returns `None` for points behind the camera.
    pub fn world_to_screen(&self, pos: Vec3) -> Option<Vec2> {
        let clip = self.world_to_clip(pos);

        if clip.w > 0.0 {
            Some(self.clip_to_screen(clip))
        } else {
            None
        }
    }

    /// Given a point in clip-coordinates, returns it in screen-coordinates.
    ///
    /// Screen-coordinates start at the top-left corner of the screen, with
    /// the center of pixel `(x, y)` being located at `(x + 0.5, y + 0.5)`.
    pub fn clip_to_screen(&self, pos: Vec4) -> Vec2 {
        let ndc = pos.xy() / pos.w;
        let ndc = vec2(ndc.x, -ndc.y);

        (0.5 * ndc + 0.5) * self.screen.xy()
    }

    pub fn screen_size(&self) -> UVec2 {
        self.screen.xy().as_uvec2()
    }

    /// Returns whether given point lays inside the screen.
    pub fn contains(&self, pos: IVec2) -> bool {
        let screen_size = self.screen.xy().as_ivec2();

        pos.x >= 0
            && pos.y >= 0
            && pos.x < screen_size.x
            && pos.y < screen_size.y
    }
}
