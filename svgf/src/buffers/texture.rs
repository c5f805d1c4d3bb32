use derivative::Derivative;
use glam::{UVec2, Vec4};
use log::debug;
use svgf_kernels::TexRgba32;

/// Two-dimensional, RGBA32F texture living in the host's memory.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct Texture {
    label: String,
    size: UVec2,
    #[derivative(Debug = "ignore")]
    data: Vec<Vec4>,
}

impl Texture {
    pub fn new(label: impl AsRef<str>, size: UVec2) -> Self {
        let label = label.as_ref();

        debug!("Allocating texture `{label}`; size={:?}", size);

        assert!(size.x > 0);
        assert!(size.y > 0);

        Self {
            label: label.to_owned(),
            size,
            data: vec![Vec4::ZERO; (size.x as usize) * (size.y as usize)],
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn readable(&self) -> TexRgba32<'_> {
        TexRgba32::new(&self.data, self.size)
    }

    pub fn read(&self, pos: UVec2) -> Vec4 {
        self.readable().read(pos)
    }

    pub fn data(&self) -> &[Vec4] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [Vec4] {
        &mut self.data
    }

    pub fn clear(&mut self) {
        self.data.fill(Vec4::ZERO);
    }

    pub fn copy_from(&mut self, other: &Self) {
        assert_eq!(self.size, other.size);

        self.data.copy_from_slice(&other.data);
    }
}

#[cfg(test)]
mod tests {
    use glam::{uvec2, vec4};

    use super::*;

    #[test]
    fn texture() {
        let mut target = Texture::new("test", uvec2(3, 2));

        assert_eq!("test", target.label());
        assert_eq!(6, target.data().len());
        assert!(target.data().iter().all(|texel| *texel == Vec4::ZERO));

        target.data_mut()[4] = vec4(1.0, 2.0, 3.0, 4.0);

        assert_eq!(vec4(1.0, 2.0, 3.0, 4.0), target.read(uvec2(1, 1)));

        let mut other = Texture::new("other", uvec2(3, 2));

        other.copy_from(&target);

        assert_eq!(vec4(1.0, 2.0, 3.0, 4.0), other.read(uvec2(1, 1)));

        target.clear();

        assert_eq!(Vec4::ZERO, target.read(uvec2(1, 1)));
    }
}
