use glam::UVec2;

use crate::Texture;

/// Pair of buffers where one plays the role of the current buffer (written
/// to) and the other one of the previous buffer (read from); the roles get
/// swapped by [`Self::flip()`].
#[derive(Debug)]
pub struct DoubleBuffered<T> {
    a: T,
    b: T,
    alternate: bool,
}

impl DoubleBuffered<Texture> {
    /// Creates a double-buffered texture.
    ///
    /// See: [`Texture::new()`].
    pub fn new(label: impl AsRef<str>, size: UVec2) -> Self {
        let label = label.as_ref();

        Self::from_pair(
            Texture::new(format!("{}_a", label), size),
            Texture::new(format!("{}_b", label), size),
        )
    }
}

impl<T> DoubleBuffered<T> {
    pub fn from_pair(a: T, b: T) -> Self {
        Self {
            a,
            b,
            alternate: false,
        }
    }

    pub fn get(&self, alternate: bool) -> &T {
        if alternate {
            &self.b
        } else {
            &self.a
        }
    }

    pub fn curr(&self) -> &T {
        self.get(self.alternate)
    }

    pub fn prev(&self) -> &T {
        self.get(!self.alternate)
    }

    pub fn curr_mut(&mut self) -> &mut T {
        if self.alternate {
            &mut self.b
        } else {
            &mut self.a
        }
    }

    /// Returns the current buffer for writing and the previous one for
    /// reading.
    pub fn split_mut(&mut self) -> (&mut T, &T) {
        if self.alternate {
            (&mut self.b, &self.a)
        } else {
            (&mut self.a, &self.b)
        }
    }

    pub fn both_mut(&mut self) -> [&mut T; 2] {
        [&mut self.a, &mut self.b]
    }

    pub fn flip(&mut self) {
        self.alternate = !self.alternate;
    }
}

#[cfg(test)]
mod tests {
    use glam::uvec2;

    use super::*;

    #[test]
    fn roles_alternate() {
        let mut target = DoubleBuffered::from_pair(None, None);

        for frame in 1..=10 {
            target.flip();
            *target.curr_mut() = Some(frame);

            assert_eq!(Some(frame), *target.curr());

            if frame > 1 {
                assert_eq!(Some(frame - 1), *target.prev());
            }
        }
    }

    #[test]
    fn split_mut() {
        let mut target = DoubleBuffered::from_pair(1, 2);

        {
            let (curr, prev) = target.split_mut();

            assert_eq!(2, *prev);
            *curr = 10;
        }

        target.flip();

        let (curr, prev) = target.split_mut();

        assert_eq!(10, *prev);
        assert_eq!(2, *curr);
    }

    #[test]
    fn labels() {
        let mut target = DoubleBuffered::new("colors", uvec2(2, 2));

        assert_eq!("colors_a", target.curr().label());
        assert_eq!("colors_b", target.prev().label());

        target.flip();

        assert_eq!("colors_b", target.curr().label());
        assert_eq!("colors_a", target.prev().label());
    }
}
