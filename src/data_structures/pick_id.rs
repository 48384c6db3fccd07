/// The unique colour an object is painted with during the id pass.
///
/// The tag is compared byte for byte with the pixel read back under the
/// cursor. Uniqueness across a scene is up to whoever assigns the tags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PickId([u8; 3]);

impl PickId {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    pub fn set(&mut self, r: u8, g: u8, b: u8) {
        self.0 = [r, g, b];
    }

    pub const fn rgb(&self) -> [u8; 3] {
        self.0
    }

    pub fn matches(&self, colour: [u8; 3]) -> bool {
        self.0 == colour
    }

    /// Normalised colour for the id-pass fragment shader (alpha is always 1).
    pub fn to_uniform(&self) -> [f32; 4] {
        let [r, g, b] = self.0;
        [
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            1.0,
        ]
    }
}

impl From<[u8; 3]> for PickId {
    fn from(rgb: [u8; 3]) -> Self {
        Self(rgb)
    }
}

impl std::fmt::Display for PickId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_its_own_colour_including_boundaries() {
        for id in [
            PickId::new(0, 0, 0),
            PickId::new(255, 255, 255),
            PickId::new(255, 0, 0),
            PickId::new(0, 255, 0),
            PickId::new(12, 34, 56),
        ] {
            assert!(id.matches(id.rgb()), "{id} does not match itself");
        }
    }

    #[test]
    fn any_differing_byte_is_a_mismatch() {
        let id = PickId::new(10, 20, 30);
        assert!(!id.matches([11, 20, 30]));
        assert!(!id.matches([10, 21, 30]));
        assert!(!id.matches([10, 20, 31]));
    }

    #[test]
    fn set_replaces_the_tag() {
        let mut id = PickId::default();
        id.set(0, 255, 0);
        assert_eq!(id.rgb(), [0, 255, 0]);
        assert!(!id.matches([0, 0, 0]));
    }

    #[test]
    fn uniform_is_normalised_and_round_trips_through_unorm8() {
        let id = PickId::new(255, 128, 0);
        let [r, g, b, a] = id.to_uniform();
        assert_eq!((r, b, a), (1.0, 0.0, 1.0));
        // Rgba8Unorm stores round(value * 255).
        assert_eq!((g * 255.0).round() as u8, 128);
    }
}
