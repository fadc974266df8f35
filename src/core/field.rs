use std::borrow::Cow;

/// A nullable text value that can be written as one CSV field.
///
/// `None` is the null value; encoders write it as empty text. Implemented for
/// the usual string types, for `Option` of any of them and for references.
pub trait Field {
    fn as_field(&self) -> Option<&str>;
}

impl Field for str {
    fn as_field(&self) -> Option<&str> {
        Some(self)
    }
}

impl Field for String {
    fn as_field(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

impl Field for Cow<'_, str> {
    fn as_field(&self) -> Option<&str> {
        Some(self.as_ref())
    }
}

impl<T: AsRef<str>> Field for Option<T> {
    fn as_field(&self) -> Option<&str> {
        self.as_ref().map(|value| value.as_ref())
    }
}

impl<T: Field + ?Sized> Field for &T {
    fn as_field(&self) -> Option<&str> {
        (**self).as_field()
    }
}
