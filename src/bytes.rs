use std::{borrow::Cow, fmt};

/// Hex rendition of a raw MIDI buffer, for logs & errors.
#[derive(Debug, Clone)]
pub struct Displayable<'a>(Cow<'a, [u8]>);

impl<'a> From<&'a [u8]> for Displayable<'a> {
    fn from(buf: &'a [u8]) -> Self {
        Self(Cow::Borrowed(buf))
    }
}

impl From<Vec<u8>> for Displayable<'static> {
    fn from(buf: Vec<u8>) -> Self {
        Self(Cow::Owned(buf))
    }
}

impl<'a> Displayable<'a> {
    pub fn to_owned(&self) -> Displayable<'static> {
        Displayable(Cow::Owned(self.0.to_vec()))
    }
}

impl<'a> fmt::Display for Displayable<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;

        for (idx, byte) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02x}")?;
        }

        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::Displayable;

    #[test]
    fn hex() {
        let buf = [0x90u8, 0x08, 0x7f];
        assert_eq!(Displayable::from(buf.as_slice()).to_string(), "[90 08 7f]");
        assert_eq!(Displayable::from(Vec::new()).to_string(), "[]");
    }
}
