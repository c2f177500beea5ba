/// Implements [`Wire`](vlwire_codec::Wire) for a struct whose fields are
/// laid out back to back in declaration order.
///
/// ```ignore
/// wire_struct!(Page { page });
/// ```
macro_rules! wire_struct {
    ($ty:ident { $($field:ident),* $(,)? }) => {
        impl vlwire_codec::Wire for $ty {
            fn encode(&self, dst: &mut impl bytes::BufMut) {
                $(vlwire_codec::Wire::encode(&self.$field, dst);)*
            }

            fn decode(
                src: &mut vlwire_codec::Reader<'_>,
            ) -> Result<Self, vlwire_codec::CodecError> {
                Ok(Self {
                    $($field: vlwire_codec::Wire::decode(src)?,)*
                })
            }
        }
    };
}
